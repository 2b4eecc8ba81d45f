mod consumption;

pub use consumption::ConsumptionRepository;
