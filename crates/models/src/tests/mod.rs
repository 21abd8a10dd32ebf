
/// CRUD operations tests against Postgres
pub mod crud_tests;
