mod graphql;
pub mod mock;
mod monday;
mod traits;

pub use mock::{MockBoardService, StatusWrite};
pub use monday::{MondayConfig, MondayService, DEFAULT_API_URL};
pub use traits::BoardService;
