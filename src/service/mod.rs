pub mod crud;
pub mod query;
pub mod validation;

pub use crud::CrudService;
pub use query::DocumentQuery;
pub use validation::DocumentValidator;
