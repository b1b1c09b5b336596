use std::{path::Path, sync::Arc};

use crate::{highlight::CodeHighlighter, workspace::Workspace};

/// Shared by every request. Nothing in here changes after startup.
#[derive(Clone)]
pub struct ServerState {
    pub workspace: Arc<Workspace>,
    pub highlighter: Arc<CodeHighlighter>,
}

impl ServerState {
    pub fn new(root: &Path) -> Self {
        Self {
            workspace: Arc::new(Workspace::open(root)),
            highlighter: Arc::new(CodeHighlighter::new()),
        }
    }
}
