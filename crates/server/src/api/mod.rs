mod cards;
mod handlers;
mod routes;
mod sets;
mod sync;

pub use routes::create_router;
