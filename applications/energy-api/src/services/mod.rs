mod consumption;

pub use consumption::ConsumptionService;
