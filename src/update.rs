//! Registrar update client and response interpretation.

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

/// Client issuing the registrar's per-host update call.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UpdateClient: Send + Sync {
    /// Submit an update pointing `host_label` at `new_ip`.
    ///
    /// Returns the raw response body on transport success; the body may
    /// still carry a provider-side error, which [`is_update_successful`]
    /// decides.
    async fn submit_update(&self, host_label: &str, new_ip: &str) -> Result<String>;
}

/// Namecheap dynamic-DNS update client.
///
/// Namecheap answers every update with a small XML document; success is
/// signalled by `<ErrCount>0</ErrCount>`.
pub struct NamecheapClient {
    client: reqwest::Client,
    domain: String,
    password: String,
    url_template: String,
}

impl NamecheapClient {
    /// Create a client for one domain.
    ///
    /// `url_template` carries `{host}`, `{domain}`, `{password}` and
    /// `{newIp}` placeholders.
    pub fn new(domain: String, password: String, url_template: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            domain,
            password,
            url_template,
        }
    }

    fn build_url(&self, host_label: &str, new_ip: &str) -> String {
        self.url_template
            .replace("{host}", host_label)
            .replace("{domain}", &self.domain)
            .replace("{password}", &self.password)
            .replace("{newIp}", new_ip)
    }
}

#[async_trait]
impl UpdateClient for NamecheapClient {
    async fn submit_update(&self, host_label: &str, new_ip: &str) -> Result<String> {
        // The URL embeds the password; it must never reach a log line.
        let url = self.build_url(host_label, new_ip);

        let response = self.client.get(&url).send().await?;
        let text = response.text().await?;
        Ok(text)
    }
}

/// Decide whether a registrar response reports success.
///
/// Success requires an `<ErrCount>` element whose value is numerically
/// zero. A missing element, a non-numeric value, or an empty body all count
/// as failure; the check fails closed.
pub fn is_update_successful(body: &str) -> bool {
    err_count(body) == Some(0)
}

fn err_count(body: &str) -> Option<u32> {
    let value = element_text(body, "ErrCount")?;
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// Pull the first error message out of a failure response, if present.
pub fn extract_error_message(body: &str) -> Option<String> {
    element_text(body, "Err1").map(str::to_string)
}

fn element_text<'a>(body: &'a str, element: &str) -> Option<&'a str> {
    let open = format!("<{}>", element);
    let close = format!("</{}>", element);

    let start = body.find(&open)? + open.len();
    let end = body[start..].find(&close)? + start;
    Some(body[start..end].trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SUCCESS_BODY: &str = r#"<?xml version="1.0"?>
        <interface-response>
            <Command>SETDNSHOST</Command>
            <IP>1.2.3.4</IP>
            <ErrCount>0</ErrCount>
            <Done>true</Done>
        </interface-response>"#;

    const FAILURE_BODY: &str = r#"<?xml version="1.0"?>
        <interface-response>
            <ErrCount>1</ErrCount>
            <Err1>Passwords do not match</Err1>
        </interface-response>"#;

    fn template(base: &str) -> String {
        format!(
            "{}/update?host={{host}}&domain={{domain}}&password={{password}}&ip={{newIp}}",
            base
        )
    }

    #[tokio::test]
    async fn test_update_url_substitution() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/update"))
            .and(query_param("host", "vpn"))
            .and(query_param("domain", "example.com"))
            .and(query_param("password", "secret123"))
            .and(query_param("ip", "1.2.3.4"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SUCCESS_BODY))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = NamecheapClient::new(
            "example.com".to_string(),
            "secret123".to_string(),
            template(&mock_server.uri()),
        );

        let body = client.submit_update("vpn", "1.2.3.4").await.unwrap();
        assert!(is_update_successful(&body));
    }

    #[tokio::test]
    async fn test_provider_error_passes_through_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/update"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FAILURE_BODY))
            .mount(&mock_server)
            .await;

        let client = NamecheapClient::new(
            "example.com".to_string(),
            "wrong".to_string(),
            template(&mock_server.uri()),
        );

        // Transport succeeded, so the body comes back for interpretation.
        let body = client.submit_update("vpn", "1.2.3.4").await.unwrap();
        assert!(!is_update_successful(&body));
        assert_eq!(
            extract_error_message(&body),
            Some("Passwords do not match".to_string())
        );
    }

    #[tokio::test]
    async fn test_transport_error_is_reported() {
        let client = NamecheapClient::new(
            "example.com".to_string(),
            "secret".to_string(),
            template("http://127.0.0.1:1"),
        );

        assert!(client.submit_update("vpn", "1.2.3.4").await.is_err());
    }

    #[tokio::test]
    async fn test_transport_error_omits_password() {
        // The update URL embeds the password; a transport error must not
        // carry it into the rendered message.
        let client = NamecheapClient::new(
            "example.com".to_string(),
            "supersecret123".to_string(),
            template("http://127.0.0.1:1"),
        );

        let err = client.submit_update("www", "1.2.3.4").await.unwrap_err();
        let rendered = format!("{} / {:?}", err, err);
        assert!(!rendered.contains("supersecret123"));
    }

    #[test]
    fn test_err_count_zero_is_success() {
        assert!(is_update_successful("<ErrCount>0</ErrCount>"));
        assert!(is_update_successful(SUCCESS_BODY));
    }

    #[test]
    fn test_err_count_nonzero_is_failure() {
        assert!(!is_update_successful("<ErrCount>1</ErrCount>"));
        assert!(!is_update_successful(FAILURE_BODY));
        assert!(!is_update_successful("<ErrCount>9</ErrCount>"));
    }

    #[test]
    fn test_missing_err_count_fails_closed() {
        assert!(!is_update_successful(""));
        assert!(!is_update_successful("<html>gateway timeout</html>"));
        assert!(!is_update_successful("<ErrCount></ErrCount>"));
        assert!(!is_update_successful("<ErrCount>OK</ErrCount>"));
        assert!(!is_update_successful("<ErrCount>0"));
    }

    #[test]
    fn test_err_count_whitespace_tolerated() {
        assert!(is_update_successful("<ErrCount> 0 </ErrCount>"));
    }

    #[test]
    fn test_extract_error_message_absent() {
        assert_eq!(extract_error_message(SUCCESS_BODY), None);
    }
}
