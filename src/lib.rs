pub mod dist;
pub mod html;
pub mod http;
pub mod index;
pub mod name;
pub mod report;
pub mod scan;
pub mod spider;
