mod debug;
mod dispatcher;
mod gateway;
mod payload;

pub use debug::LogSink;
pub use dispatcher::Dispatcher;
pub use gateway::{DeliveryError, Gateway, HttpGateway, ATTEMPT_TIMEOUT};
pub use payload::{table_link_for_expression, GatewayAlert};
