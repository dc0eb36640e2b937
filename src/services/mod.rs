//! Services module
//!
//! This module contains business logic services

pub mod ai;
pub mod notification;
pub mod order;
pub mod sheets;
pub mod user;

// Re-export commonly used services
pub use ai::{AiService, GeminiClient};
pub use notification::{MessageTemplate, NotificationService};
pub use order::{BroadcastReport, OrderService};
pub use sheets::SheetsService;
pub use user::UserService;

use teloxide::Bot;

use crate::config::Settings;
use crate::database::DatabaseService;
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Debug, Clone)]
pub struct ServiceFactory {
    pub user_service: UserService,
    pub order_service: OrderService,
    pub notification_service: NotificationService,
    pub ai_service: AiService,
    pub sheets_service: SheetsService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(bot: Bot, settings: Settings, db: DatabaseService) -> Result<Self> {
        let notification_service = NotificationService::new(bot, settings.clone());
        let sheets_service = SheetsService::new(&settings.sheets)?;
        let ai_service = AiService::new(db.clone(), &settings.ai)?;
        let order_service = OrderService::new(
            db.clone(),
            notification_service.clone(),
            sheets_service.clone(),
        );
        let user_service = UserService::new(db, settings);

        Ok(Self {
            user_service,
            order_service,
            notification_service,
            ai_service,
            sheets_service,
        })
    }
}
