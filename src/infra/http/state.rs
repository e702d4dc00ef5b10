use std::sync::Arc;

use crate::application::blogs::BlogService;
use crate::application::sessions::{AdminDirectory, SessionService};
use crate::application::users::UserService;

/// Shared handler state: the application services plus the injected admin
/// directory.
#[derive(Clone)]
pub struct AppState {
    pub blogs: Arc<BlogService>,
    pub users: Arc<UserService>,
    pub sessions: Arc<SessionService>,
    pub admins: Arc<AdminDirectory>,
}
