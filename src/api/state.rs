use std::sync::Arc;

use handlebars::Handlebars;

use crate::chat::ChatService;
use crate::core::AppConfig;

use super::views::templates;

pub struct AppState {
    pub chat: ChatService,
    pub templates: Arc<Handlebars<'static>>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(chat: ChatService, config: AppConfig) -> Self {
        Self {
            chat,
            templates: Arc::new(templates()),
            config,
        }
    }
}
