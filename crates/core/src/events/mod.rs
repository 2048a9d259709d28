pub mod realtime_event;
pub mod router;
pub mod sink;


pub use realtime_event::{RealtimeEvent, Source};
pub use router::EventRouter;
pub use sink::{MockPriceSink, MockSignalSink, NoOpPriceSink, NoOpSignalSink, PriceSink, SignalSink};
