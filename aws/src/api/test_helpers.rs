//! Test helpers for the EC2 API

#[cfg(test)]
pub fn create_test_client(url: &str) -> super::Client {
    super::Client::new(url, Some("test-token"), true).unwrap()
}
