// handlers/protected/mod.rs - Protected handlers (session required)
//
// Which roles reach each handler is decided by ROUTE_POLICIES before the
// handler runs; handlers only add ownership checks the table cannot express
// (a teacher acting on someone else's course).

pub mod auth;
pub mod courses;
pub mod student;
pub mod teacher;
