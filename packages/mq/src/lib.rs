pub mod broccoli;
pub mod bus;
pub mod error;
pub mod memory;
pub mod models;

pub use broccoli::BroccoliBus;
pub use bus::{MessageBus, MessageBusExt, MessageHandler, handler};
pub use error::MqError;
pub use memory::MemoryBus;
pub use models::{BroccoliError, BrokerMessage, MqConfig, MqQueue, init_mq};
