// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn region_endpoints() {
    let endpoints = Endpoints::for_region("us-phoenix-1").unwrap();
    assert_eq!(endpoints.core.as_str(), "https://iaas.us-phoenix-1.oraclecloud.com/20160918");
    assert_eq!(endpoints.object_storage.as_str(), "https://objectstorage.us-phoenix-1.oraclecloud.com/");
}

#[test]
fn core_url_appends_segments() {
    let endpoints = Endpoints::for_region("eu-frankfurt-1").unwrap();
    let url = endpoints.core_url(&["instances", "ocid1.instance.oc1..x"]).unwrap();
    assert_eq!(
        url.as_str(),
        "https://iaas.eu-frankfurt-1.oraclecloud.com/20160918/instances/ocid1.instance.oc1..x"
    );
}

#[test]
fn object_names_are_percent_encoded() {
    let endpoints = Endpoints::new("http://localhost/20160918", "http://localhost").unwrap();
    let url = endpoints.object_url(&["n", "ns", "b", "bkt", "o", "a b/c"]).unwrap();
    assert_eq!(url.path(), "/n/ns/b/bkt/o/a%20b%2Fc");
}

#[test]
fn namespace_url_keeps_trailing_slash() {
    let endpoints = Endpoints::new("http://localhost/20160918", "http://localhost").unwrap();
    assert_eq!(endpoints.object_url(&["n", ""]).unwrap().path(), "/n/");
}

#[test]
fn invalid_endpoint_is_rejected() {
    assert!(Endpoints::new("not a url", "http://localhost").is_err());
}
