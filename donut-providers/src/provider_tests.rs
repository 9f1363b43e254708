//! Provider construction checks (no API keys or network needed)

#[cfg(test)]
mod provider_tests {
    use crate::Provider;

    #[test]
    #[cfg(feature = "openai")]
    fn test_openai_creation() {
        use crate::openai::OpenAI;
        let provider = OpenAI::new("test-key");
        assert!(provider.is_ok());
        let provider = provider.unwrap();
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.base_url(), "https://api.openai.com/v1");
    }

    #[test]
    #[cfg(feature = "asi-one")]
    fn test_asi_one_creation() {
        use crate::asi_one::{AsiOne, ASI_ONE_BASE_URL};
        let provider = AsiOne::new("test-key");
        assert!(provider.is_ok());
        let provider = provider.unwrap();
        assert_eq!(provider.name(), "asi-one");
        assert_eq!(provider.base_url(), ASI_ONE_BASE_URL);
    }

    #[test]
    fn test_mock_name() {
        let provider = crate::mock::MockProvider::new("hi");
        assert_eq!(provider.name(), "mock");
    }
}
