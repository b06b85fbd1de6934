pub mod enrich;
pub mod inspect;
