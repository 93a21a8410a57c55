pub mod chat_routes;
