pub mod catalog;
pub mod orders;
pub mod payments;
pub mod users;

pub use catalog::{AddonsService, CatalogError, SlotsService, TheatresService};
pub use orders::{OrderError, OrdersService};
pub use payments::{PaymentError, PaymentsService};
pub use users::{AccountError, UsersService};
