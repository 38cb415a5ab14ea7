pub mod call;
pub mod routes;
