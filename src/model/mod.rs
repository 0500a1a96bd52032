pub mod report;
pub mod schedule;
pub mod shift;
pub mod site;
pub mod worker;
