//! Tests for the Reelcast client library.
//!
//! These tests use mock servers to verify client behavior without
//! requiring a real API connection.

use reelcast_client::{
    AuthToken, ClientConfig, LibraryApi, LibraryError, MediaClient, MediaError, Params,
    StructuredData, TokenKind, VideoApi, VideoError,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(server_uri: &str, cache: &TempDir) -> ClientConfig {
    ClientConfig::new(server_uri, "C1", "K1")
        .with_library("L1")
        .with_cache_dir(cache.path())
}

fn media_client(server_uri: &str, cache: &TempDir) -> MediaClient {
    MediaClient::new(test_config(server_uri, cache), false).unwrap()
}

async fn mount_auth(server: &MockServer, kind: &str, signature: &str, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/api/{}", kind)))
        .respond_with(ResponseTemplate::new(200).set_body_string(signature))
        .expect(expected_calls)
        .mount(server)
        .await;
}

// =============================================================================
// Authentication Tests
// =============================================================================

mod authentication {
    use super::*;

    #[tokio::test]
    async fn test_view_signature_fetched_and_cached() {
        let server = MockServer::start().await;
        let cache = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/api/view_key"))
            .and(query_param("licenseKey", "K1"))
            .and(query_param("duration", "15"))
            .respond_with(ResponseTemplate::new(200).set_body_string("VIEWSIG1"))
            .expect(1)
            .mount(&server)
            .await;

        let client = media_client(&server.uri(), &cache);

        let first = client.authenticate_for_view(None).await.unwrap();
        assert_eq!(first, "VIEWSIG1");

        // Subsequent calls are served from the cache; the mock's
        // expect(1) fails the test if a second fetch happens.
        for _ in 0..5 {
            let again = client.authenticate_for_view(None).await.unwrap();
            assert_eq!(again, "VIEWSIG1");
        }

        assert!(!client.view_token_expired().await);
    }

    #[tokio::test]
    async fn test_cached_signature_needs_no_network_call() {
        let server = MockServer::start().await;
        let cache = TempDir::new().unwrap();

        // Seed the shared cache file directly, as another process would.
        let mut token = AuthToken::with_cache_dir(TokenKind::View, "K1", cache.path()).unwrap();
        token.renew("SEEDED42", 15).await.unwrap();

        Mock::given(method("GET"))
            .and(path("/api/view_key"))
            .respond_with(ResponseTemplate::new(200).set_body_string("SHOULDNOTFETCH"))
            .expect(0)
            .mount(&server)
            .await;

        let client = media_client(&server.uri(), &cache);
        let signature = client.authenticate_for_view(None).await.unwrap();
        assert_eq!(signature, "SEEDED42");
    }

    #[tokio::test]
    async fn test_expired_signature_is_refetched_and_cache_updated() {
        let server = MockServer::start().await;
        let cache = TempDir::new().unwrap();

        // A 5-minute signature issued 10 minutes ago is expired.
        let now = chrono::Utc::now().timestamp();
        let mut token = AuthToken::with_cache_dir(TokenKind::View, "K1", cache.path()).unwrap();
        token.renew_at("STALESIG", 5, now - 600).await.unwrap();

        mount_auth(&server, "view_key", "FRESHSIG", 1).await;

        let client = media_client(&server.uri(), &cache);
        let signature = client.authenticate_for_view(None).await.unwrap();
        assert_eq!(signature, "FRESHSIG");
        assert!(!client.view_token_expired().await);

        // The durable cache reflects the renewal.
        let mut reloaded =
            AuthToken::with_cache_dir(TokenKind::View, "K1", cache.path()).unwrap();
        assert_eq!(reloaded.signature().await.as_deref(), Some("FRESHSIG"));
        assert_eq!(reloaded.duration_in_minutes().await, 15);
    }

    #[tokio::test]
    async fn test_duration_override_is_requested() {
        let server = MockServer::start().await;
        let cache = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/api/update_key"))
            .and(query_param("duration", "25"))
            .respond_with(ResponseTemplate::new(200).set_body_string("UPDSIG"))
            .expect(1)
            .mount(&server)
            .await;

        let client = media_client(&server.uri(), &cache);
        let signature = client.authenticate_for_update(Some(25)).await.unwrap();
        assert_eq!(signature, "UPDSIG");
    }

    #[tokio::test]
    async fn test_auth_fetch_failure_is_authentication_failed() {
        let server = MockServer::start().await;
        let cache = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/api/update_key"))
            .respond_with(ResponseTemplate::new(403).set_body_string("license key rejected"))
            .mount(&server)
            .await;

        let client = media_client(&server.uri(), &cache);
        let err = client.authenticate_for_update(None).await.unwrap_err();

        match err {
            MediaError::AuthenticationFailed { code, message } => {
                assert_eq!(code, Some(403));
                assert!(message.contains("license key rejected"));
            }
            e => panic!("Expected AuthenticationFailed, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_html_error_page_with_200_is_authentication_failed() {
        let server = MockServer::start().await;
        let cache = TempDir::new().unwrap();

        mount_auth(&server, "view_key", "<html>Too many requests</html>", 1).await;

        let client = media_client(&server.uri(), &cache);
        let err = client.authenticate_for_view(None).await.unwrap_err();
        assert!(matches!(err, MediaError::AuthenticationFailed { .. }));
    }

    #[tokio::test]
    async fn test_signature_with_trailing_newline_is_accepted() {
        let server = MockServer::start().await;
        let cache = TempDir::new().unwrap();

        mount_auth(&server, "view_key", "ABC123\n", 1).await;

        let client = media_client(&server.uri(), &cache);
        let signature = client.authenticate_for_view(None).await.unwrap();
        assert_eq!(signature, "ABC123\n");
    }

    #[tokio::test]
    async fn test_reset_auth_token_cache_forces_refetch() {
        let server = MockServer::start().await;
        let cache = TempDir::new().unwrap();

        mount_auth(&server, "view_key", "VIEWSIG1", 2).await;

        let client = media_client(&server.uri(), &cache);
        client.authenticate_for_view(None).await.unwrap();
        assert!(!client.view_token_expired().await);

        client.reset_auth_token_cache().await.unwrap();
        assert!(client.view_token_expired().await);

        // Fetches again after the reset; expect(2) checks exactly two.
        client.authenticate_for_view(None).await.unwrap();
    }
}

// =============================================================================
// Ingest Authentication Tests
// =============================================================================

mod ingest {
    use super::*;

    #[tokio::test]
    async fn test_ingest_end_to_end() {
        let server = MockServer::start().await;
        let cache = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/api/ingest_key"))
            .and(query_param("userID", "alice"))
            .and(query_param("library_id", "L1"))
            .and(query_param("licenseKey", "K1"))
            .and(query_param("duration", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("INGESTSIG"))
            .expect(1)
            .mount(&server)
            .await;

        let client = media_client(&server.uri(), &cache);
        let signature = client
            .authenticate_for_ingest("alice", Params::new())
            .await
            .unwrap();
        assert_eq!(signature, "INGESTSIG");

        // The cache write recorded the zero duration.
        let mut token =
            AuthToken::with_cache_dir(TokenKind::Ingest, "K1", cache.path()).unwrap();
        assert_eq!(token.signature().await.as_deref(), Some("INGESTSIG"));
        assert_eq!(token.duration_in_minutes().await, 0);
    }

    #[tokio::test]
    async fn test_zero_duration_forces_fetch_every_call() {
        let server = MockServer::start().await;
        let cache = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/api/ingest_key"))
            .respond_with(ResponseTemplate::new(200).set_body_string("INGESTSIG"))
            .expect(3)
            .mount(&server)
            .await;

        let client = media_client(&server.uri(), &cache);
        for _ in 0..3 {
            client
                .authenticate_for_ingest("alice", Params::new())
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_ingest_profile_param_is_forwarded() {
        let server = MockServer::start().await;
        let cache = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/api/ingest_key"))
            .and(query_param("ingest_profile", "hd"))
            .and(query_param("userID", "alice"))
            .respond_with(ResponseTemplate::new(200).set_body_string("INGESTSIG"))
            .expect(1)
            .mount(&server)
            .await;

        let client = media_client(&server.uri(), &cache);
        client
            .authenticate_for_ingest("alice", Params::new().set("ingest_profile", "hd"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_blank_contributor_fails_locally() {
        let server = MockServer::start().await;
        let cache = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/api/ingest_key"))
            .respond_with(ResponseTemplate::new(200).set_body_string("INGESTSIG"))
            .expect(0)
            .mount(&server)
            .await;

        let client = media_client(&server.uri(), &cache);
        let err = client
            .authenticate_for_ingest("   ", Params::new())
            .await
            .unwrap_err();

        match err {
            MediaError::Validation(message) => assert!(message.contains("contributor")),
            e => panic!("Expected Validation, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_missing_library_scope_fails_locally() {
        let server = MockServer::start().await;
        let cache = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/api/ingest_key"))
            .respond_with(ResponseTemplate::new(200).set_body_string("INGESTSIG"))
            .expect(0)
            .mount(&server)
            .await;

        let config = ClientConfig::new(server.uri(), "C1", "K1").with_cache_dir(cache.path());
        let client = MediaClient::new(config, false).unwrap();
        let err = client
            .authenticate_for_ingest("alice", Params::new())
            .await
            .unwrap_err();

        match err {
            MediaError::Validation(message) => assert!(message.contains("library ID")),
            e => panic!("Expected Validation, got: {:?}", e),
        }
    }
}

// =============================================================================
// Error Mapping Tests
// =============================================================================

mod error_mapping {
    use super::*;

    #[tokio::test]
    async fn test_server_error_maps_to_family_service_error() {
        let server = MockServer::start().await;
        let cache = TempDir::new().unwrap();

        mount_auth(&server, "view_key", "VIEWSIG1", 1).await;
        Mock::given(method("GET"))
            .and(path("/videos/V1.json"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let api = VideoApi::from_config(test_config(&server.uri(), &cache), false).unwrap();
        let err = api
            .get_video_metadata("V1", None, Params::new())
            .await
            .unwrap_err();

        match err {
            VideoError::Service(inner) => {
                assert_eq!(inner.code(), Some(500));
                let text = inner.to_string();
                assert!(text.contains("Server returned code 500"));
                assert!(text.contains("boom"));
            }
            e => panic!("Expected Service, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_auth_failure_surfaces_as_family_auth_error() {
        let server = MockServer::start().await;
        let cache = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/api/view_key"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let api = VideoApi::from_config(test_config(&server.uri(), &cache), false).unwrap();
        let err = api
            .get_video_metadata("V1", None, Params::new())
            .await
            .unwrap_err();

        assert!(
            matches!(err, VideoError::AuthenticationFailed(_)),
            "got: {:?}",
            err
        );
    }

    #[tokio::test]
    async fn test_library_family_keeps_the_distinction_too() {
        let server = MockServer::start().await;
        let cache = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/api/update_key"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let api = LibraryApi::from_config(test_config(&server.uri(), &cache), false).unwrap();

        let auth_err = api
            .update_library("L1", Params::new().set("name", "New"))
            .await
            .unwrap_err();
        assert!(matches!(auth_err, LibraryError::AuthenticationFailed(_)));
    }

    #[tokio::test]
    async fn test_connection_failure_has_no_code() {
        let cache = TempDir::new().unwrap();

        // Nothing listens on port 1.
        let config = ClientConfig::new("http://127.0.0.1:1", "C1", "K1")
            .with_library("L1")
            .with_cache_dir(cache.path());
        let client = MediaClient::new(config, false).unwrap();

        let err = client.authenticate_for_view(None).await.unwrap_err();
        match err {
            MediaError::AuthenticationFailed { code, .. } => assert_eq!(code, None),
            e => panic!("Expected AuthenticationFailed, got: {:?}", e),
        }
    }
}

// =============================================================================
// Structured Data Tests
// =============================================================================

mod structured_data {
    use super::*;

    #[tokio::test]
    async fn test_no_format_decodes_json_into_tree() {
        let server = MockServer::start().await;
        let cache = TempDir::new().unwrap();

        mount_auth(&server, "view_key", "VIEWSIG1", 1).await;
        Mock::given(method("GET"))
            .and(path("/videos/V1.json"))
            .and(query_param("signature", "VIEWSIG1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "video_id": "V1",
                "title": "Launch Day",
                "duration": 95.5,
                "tags": [{"name": "a", "count": 2}]
            })))
            .mount(&server)
            .await;

        let api = VideoApi::from_config(test_config(&server.uri(), &cache), false).unwrap();
        let data = api
            .get_video_metadata("V1", None, Params::new())
            .await
            .unwrap();

        let tree = data.decoded().expect("decoded tree");
        assert_eq!(tree["title"].as_str(), Some("Launch Day"));
        assert_eq!(tree["duration"].as_f64(), Some(95.5));
        assert_eq!(tree["tags"][0]["count"].as_i64(), Some(2));
    }

    #[tokio::test]
    async fn test_explicit_format_returns_raw_text() {
        let server = MockServer::start().await;
        let cache = TempDir::new().unwrap();

        mount_auth(&server, "view_key", "VIEWSIG1", 1).await;
        Mock::given(method("GET"))
            .and(path("/videos/V1.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<video id=\"V1\"/>"))
            .mount(&server)
            .await;

        let api = VideoApi::from_config(test_config(&server.uri(), &cache), false).unwrap();
        let data = api
            .get_video_metadata("V1", Some("xml"), Params::new())
            .await
            .unwrap();

        assert_eq!(data.raw(), Some("<video id=\"V1\"/>"));
    }

    #[tokio::test]
    async fn test_search_uses_prebuilt_url_verbatim() {
        let server = MockServer::start().await;
        let cache = TempDir::new().unwrap();

        mount_auth(&server, "view_key", "VIEWSIG1", 1).await;
        Mock::given(method("GET"))
            .and(path("/companies/C1/libraries/L1/videos.json"))
            .and(query_param("query", "balloons"))
            .and(query_param("signature", "VIEWSIG1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "videos": [{"video_id": "V1"}, {"video_id": "V2"}],
                "page_info": {"page_number": 1, "is_last_page": true}
            })))
            .mount(&server)
            .await;

        let api = VideoApi::from_config(test_config(&server.uri(), &cache), false).unwrap();
        let data = api
            .search_videos(Params::new().set("query", "balloons"), None)
            .await
            .unwrap();

        let tree = data.decoded().expect("decoded tree");
        assert_eq!(tree["videos"].members().count(), 2);
        assert_eq!(tree["page_info"]["is_last_page"].as_bool(), Some(true));
    }

    #[tokio::test]
    async fn test_invalid_json_is_a_parse_error() {
        let server = MockServer::start().await;
        let cache = TempDir::new().unwrap();

        mount_auth(&server, "view_key", "VIEWSIG1", 1).await;
        Mock::given(method("GET"))
            .and(path("/videos/V1.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let api = VideoApi::from_config(test_config(&server.uri(), &cache), false).unwrap();
        let err = api
            .get_video_metadata("V1", None, Params::new())
            .await
            .unwrap_err();

        assert!(matches!(err, VideoError::Service(MediaError::Parse(_))));
    }
}

// =============================================================================
// Resource Update Tests
// =============================================================================

mod updates {
    use super::*;

    #[tokio::test]
    async fn test_update_library_wraps_params() {
        let server = MockServer::start().await;
        let cache = TempDir::new().unwrap();

        mount_auth(&server, "update_key", "UPDSIG", 1).await;
        Mock::given(method("PUT"))
            .and(path("/companies/C1/libraries/L1"))
            .and(query_param("library[name]", "New Name"))
            .and(query_param("signature", "UPDSIG"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let api = LibraryApi::from_config(test_config(&server.uri(), &cache), false).unwrap();
        api.update_library("L1", Params::new().set("name", "New Name"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_video_sends_delete_with_signature() {
        let server = MockServer::start().await;
        let cache = TempDir::new().unwrap();

        mount_auth(&server, "update_key", "UPDSIG", 1).await;
        Mock::given(method("DELETE"))
            .and(path("/videos/V1"))
            .and(query_param("signature", "UPDSIG"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let api = VideoApi::from_config(test_config(&server.uri(), &cache), false).unwrap();
        api.delete_video("V1").await.unwrap();
    }

    #[tokio::test]
    async fn test_create_library_posts_xml_body() {
        let server = MockServer::start().await;
        let cache = TempDir::new().unwrap();

        mount_auth(&server, "update_key", "UPDSIG", 1).await;
        Mock::given(method("POST"))
            .and(path("/companies/C1/libraries"))
            .and(query_param("signature", "UPDSIG"))
            .and(wiremock::matchers::body_string(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?><library><name>n</name></library>",
            ))
            .and(wiremock::matchers::header("content-type", "text/xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string("LIB2"))
            .expect(1)
            .mount(&server)
            .await;

        let api = LibraryApi::from_config(test_config(&server.uri(), &cache), false).unwrap();
        let body = api
            .create_library_from_xml_string(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?><library><name>n</name></library>",
                Params::new(),
            )
            .await
            .unwrap();
        assert_eq!(body, "LIB2");
    }

    #[tokio::test]
    async fn test_create_playlist_returns_body() {
        let server = MockServer::start().await;
        let cache = TempDir::new().unwrap();

        mount_auth(&server, "update_key", "UPDSIG", 1).await;
        Mock::given(method("POST"))
            .and(path("/companies/C1/playlists"))
            .and(query_param("playlist[title]", "Mix"))
            .and(query_param("signature", "UPDSIG"))
            .respond_with(ResponseTemplate::new(200).set_body_string("PL1"))
            .expect(1)
            .mount(&server)
            .await;

        let api = reelcast_client::PlaylistApi::from_config(
            test_config(&server.uri(), &cache),
            false,
        )
        .unwrap();
        let playlist_id = api
            .create_playlist(Params::new().set("title", "Mix"))
            .await
            .unwrap();
        assert_eq!(playlist_id, "PL1");
    }
}

// =============================================================================
// Shared Cache Behavior
// =============================================================================

mod shared_cache {
    use super::*;

    #[tokio::test]
    async fn test_two_clients_share_one_cache_file() {
        let server = MockServer::start().await;
        let cache = TempDir::new().unwrap();

        mount_auth(&server, "view_key", "SHAREDSIG", 1).await;

        let first = media_client(&server.uri(), &cache);
        assert_eq!(
            first.authenticate_for_view(None).await.unwrap(),
            "SHAREDSIG"
        );

        // A second instance finds the signature on disk; expect(1)
        // proves it makes no fetch of its own.
        let second = media_client(&server.uri(), &cache);
        assert_eq!(
            second.authenticate_for_view(None).await.unwrap(),
            "SHAREDSIG"
        );
    }

    #[tokio::test]
    async fn test_corrupt_shared_cache_recovers_with_one_fetch() {
        let server = MockServer::start().await;
        let cache = TempDir::new().unwrap();

        let token = AuthToken::with_cache_dir(TokenKind::View, "K1", cache.path()).unwrap();
        tokio::fs::write(token.cache_file_path(), b"\x00\x01 not json")
            .await
            .unwrap();

        mount_auth(&server, "view_key", "RECOVERED", 1).await;

        let client = media_client(&server.uri(), &cache);
        let signature = client.authenticate_for_view(None).await.unwrap();
        assert_eq!(signature, "RECOVERED");
    }

    #[test]
    fn test_structured_data_accessors() {
        let raw = StructuredData::Raw("<xml/>".to_string());
        assert_eq!(raw.raw(), Some("<xml/>"));
        assert!(raw.decoded().is_none());
    }
}
