pub mod content;

pub use content::remove_html_tags;
