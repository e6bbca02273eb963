// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use ocisnap_core::Backoff;

use super::{Endpoints, OciHttp, RequestSigner};

pub(crate) const KEY_ID: &str = "ocid1.tenancy.oc1..t/ocid1.user.oc1..u/aa:bb";

/// Signed client with millisecond retries, three attempts
pub(crate) fn http() -> OciHttp {
    let signer =
        RequestSigner::from_pem(KEY_ID, include_str!("testdata/test_key_pkcs8.pem")).unwrap();
    let retry =
        Backoff::new(Duration::from_millis(1), Duration::from_millis(2), Duration::from_secs(1));
    OciHttp::new(signer, Duration::from_secs(5)).unwrap().with_retry(retry, 3)
}

pub(crate) fn endpoints(server: &mockito::ServerGuard) -> Endpoints {
    Endpoints::new(&format!("{}/20160918", server.url()), &server.url()).unwrap()
}

/// `authorization` header of a correctly signed request
pub(crate) fn signature_header() -> mockito::Matcher {
    mockito::Matcher::Regex(format!(
        r#"^Signature version="1",keyId="{}",algorithm="rsa-sha256",headers="date \(request-target\) host"#,
        regex_escape(KEY_ID)
    ))
}

fn regex_escape(s: &str) -> String {
    s.replace('.', r"\.")
}
