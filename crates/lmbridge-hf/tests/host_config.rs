//! Public surface checks for host configuration and URL layout.

use lmbridge_hf::{HostConfig, HostUrls, MIRROR_HOST, PRIMARY_HOST, ReqwestBackend};

#[test]
fn default_hosts_try_primary_first() {
    let config = HostConfig::new();
    assert_eq!(config.hosts(), [PRIMARY_HOST, MIRROR_HOST]);
}

#[test]
fn reqwest_backend_builds_from_defaults() {
    assert!(ReqwestBackend::new(&HostConfig::new()).is_ok());
}

#[test]
fn every_host_gets_its_own_urls() {
    let config = HostConfig::new().with_hosts(["https://a.example/", "https://b.example"]);
    let urls: Vec<_> = config
        .hosts()
        .iter()
        .map(|host| HostUrls::new(host, "PowerServe/m").unwrap())
        .collect();

    assert_eq!(urls[0].index, "https://a.example/api/models/PowerServe/m/tree/main");
    assert_eq!(urls[1].resolve, "https://b.example/PowerServe/m/resolve/main");
}
