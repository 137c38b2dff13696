pub mod backup;
pub mod create_superuser;
pub mod initdb;
pub mod populate;
pub mod serve;

pub use backup::backup;
pub use create_superuser::{SuperuserArgs, create_superuser};
pub use initdb::init_database;
pub use populate::populate;
pub use serve::serve;
