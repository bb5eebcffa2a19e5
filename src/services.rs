pub mod analytics_service;
pub mod conversion_service;
pub mod crm_service;
