pub mod credit_graph;
pub mod distance;
