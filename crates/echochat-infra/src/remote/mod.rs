//! Remote session store adapters.

pub mod http_gateway;
