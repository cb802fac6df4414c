pub mod app_config;
pub mod catalog_repo;
pub mod database;
pub mod payment_repo;
pub mod reservation_repo;

pub use catalog_repo::StoreCatalogRepository;
pub use database::DbClient;
pub use payment_repo::StorePaymentRepository;
pub use reservation_repo::StoreReservationRepository;
