pub mod request_limits;

pub use request_limits::request_deadline_middleware;
