pub mod handlers;
pub mod header;
pub mod history;
pub mod results;
pub mod tabs;
pub mod upload_section;
pub mod utils;
