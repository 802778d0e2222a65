use handlebars::Handlebars;
use tokio_rusqlite::Connection;

use crate::api::templates;
use crate::core::AppConfig;

pub struct AppState {
    pub db: Connection,
    pub config: AppConfig,
    pub templates: Handlebars<'static>,
}

impl AppState {
    pub fn new(db: Connection, config: AppConfig) -> Self {
        Self {
            db,
            config,
            templates: templates::templates(),
        }
    }
}
