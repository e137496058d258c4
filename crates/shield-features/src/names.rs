//! Well-known feature names.
//!
//! Extractors and the scoring service must agree on keys; these constants
//! are the shared vocabulary. Extractors may still write ad-hoc names, but
//! anything the detection models consume should live here.

/// Transaction-pattern features.
pub mod transaction {
    /// Transactions sent in the analysis window.
    pub const TX_COUNT_SENT: &str = "tx_count_sent";
    /// Transactions received in the analysis window.
    pub const TX_COUNT_RECEIVED: &str = "tx_count_received";
    /// Distinct receiving counterparties.
    pub const UNIQUE_RECEIVERS_COUNT: &str = "unique_receivers_count";
    /// Distinct sending counterparties.
    pub const UNIQUE_SENDERS_COUNT: &str = "unique_senders_count";
    /// Mean transferred value.
    pub const TX_VALUE_MEAN: &str = "tx_value_mean";
    /// Standard deviation of transferred value.
    pub const TX_VALUE_STD: &str = "tx_value_std";
    /// Largest transferred value.
    pub const TX_VALUE_MAX: &str = "tx_value_max";
    /// Sent-to-received transaction ratio.
    pub const TX_SENT_RECEIVED_RATIO: &str = "tx_sent_received_ratio";
}

/// Address-clustering (transaction-graph) features.
pub mod clustering {
    /// Degree centrality in the transaction graph.
    pub const DEGREE_CENTRALITY: &str = "degree_centrality";
    /// Betweenness centrality in the transaction graph.
    pub const BETWEENNESS_CENTRALITY: &str = "betweenness_centrality";
    /// Local clustering coefficient.
    pub const CLUSTERING_COEFFICIENT: &str = "clustering_coefficient";
    /// PageRank in the transaction graph.
    pub const PAGERANK: &str = "pagerank";
    /// Size of the strongly connected component.
    pub const STRONGLY_CONNECTED_COMPONENT_SIZE: &str = "strongly_connected_component_size";
    /// K-core number.
    pub const K_CORE: &str = "k_core";
}

/// Temporal-pattern features.
pub mod temporal {
    /// Mean interval between consecutive transactions.
    pub const TX_INTERVAL_MEAN: &str = "tx_interval_mean";
    /// Standard deviation of inter-transaction intervals.
    pub const TX_INTERVAL_STD: &str = "tx_interval_std";
    /// Shortest inter-transaction interval.
    pub const TX_INTERVAL_MIN: &str = "tx_interval_min";
}

/// Gas-usage features.
pub mod gas_usage {
    /// Mean gas used per transaction.
    pub const GAS_USED_MEAN: &str = "gas_used_mean";
    /// Standard deviation of gas used.
    pub const GAS_USED_STD: &str = "gas_used_std";
    /// Mean gas unit price paid.
    pub const GAS_PRICE_MEAN: &str = "gas_price_mean";
}
