pub mod click;
pub mod url_record;

pub use click::Entity as ClickEntity;
pub use url_record::Entity as UrlRecordEntity;
