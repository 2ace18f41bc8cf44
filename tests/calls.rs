/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
mod helpers;

#[cfg(test)]
mod test {
    use crate::helpers::{self, ScriptedTransport, field};
    use ipernity::{Callable, HttpMethod, IpernityError, MethodCatalog};
    use serde_json::{Value, json};
    use std::sync::Arc;

    #[tokio::test]
    async fn unknown_method_fails_before_sending() {
        let api = helpers::client(ScriptedTransport::new());

        let err = api.call("unknown.method", &[]).await.unwrap_err();
        assert!(matches!(&err, IpernityError::UnknownMethod(m) if m == "unknown.method"));

        let err = api.path("unknown.method").unwrap().call(&[]).await.unwrap_err();
        assert!(matches!(err, IpernityError::UnknownMethod(_)));

        assert_eq!(api.transport().call_count(), 0);
    }

    #[test]
    fn reserved_names_are_not_methods() {
        let api = helpers::client(ScriptedTransport::new());

        assert!(matches!(
            api.method("_unknown"),
            Err(IpernityError::AttributeNotFound(name)) if name == "_unknown"
        ));
        assert!(matches!(
            api.method("unknown").unwrap().attr("_method"),
            Err(IpernityError::AttributeNotFound(_))
        ));
        assert!(matches!(
            api.path("album._private.getList"),
            Err(IpernityError::AttributeNotFound(_))
        ));
    }

    #[test]
    fn proxy_accumulates_names() {
        let api = helpers::client(ScriptedTransport::new());
        let method = api
            .method("album")
            .unwrap()
            .attr("docs")
            .unwrap()
            .attr("getList")
            .unwrap();
        assert_eq!(method.name(), "album.docs.getList");
        assert_eq!(api.path("album.docs.getList").unwrap().name(), method.name());
    }

    #[tokio::test]
    async fn get_method_sends_signed_query() {
        let transport = ScriptedTransport::new().ok(json!({"echo": "hello"}));
        let api = helpers::client_with_token(transport, "tok");

        let result = api
            .method("test")
            .unwrap()
            .attr("echo")
            .unwrap()
            .call(&[("echo", "hello")])
            .await
            .unwrap();
        assert_eq!(result["echo"], "hello");
        assert_eq!(result["api"]["status"], "ok");

        let requests = api.transport().requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url.as_str(), "http://api.ipernity.com/api/test.echo/json");
        assert_eq!(field(request, "echo"), Some("hello"));
        assert_eq!(field(request, "auth_token"), Some("tok"));
        assert_eq!(field(request, "api_key"), Some(helpers::API_KEY));
        assert!(field(request, "api_sig").is_some());
    }

    // Works with anything that can run a method by name
    async fn echo(api: &impl Callable, text: &str) -> Result<Value, IpernityError> {
        api.call_method("test.echo", &[("echo", text)]).await
    }

    #[tokio::test]
    async fn calls_through_callable() {
        let transport = ScriptedTransport::new()
            .ok(json!({"echo": "hi"}))
            .ok(json!({"echo": "again"}));
        let api = helpers::client(transport);

        assert_eq!(echo(&api, "hi").await.unwrap()["echo"], "hi");
        let err = api.call_method("no.such.method", &[]).await.unwrap_err();
        assert!(matches!(err, IpernityError::UnknownMethod(_)));
        assert_eq!(api.path("test.echo").unwrap().call(&[]).await.unwrap()["echo"], "again");

        assert_eq!(api.transport().methods_called(), vec!["test.echo", "test.echo"]);
        assert_eq!(field(&api.transport().requests()[0], "echo"), Some("hi"));
    }

    #[tokio::test]
    async fn post_method_moves_file_out_of_fields() {
        let transport = ScriptedTransport::new().ok(json!({"ticket": "T1"}));
        let api = helpers::client_with_token(transport, "tok");

        api.call("upload.file", &[("file", "/photos/a.jpg"), ("title", "A")])
            .await
            .unwrap();

        let request = &api.transport().requests()[0];
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.file.as_deref(), Some(std::path::Path::new("/photos/a.jpg")));
        assert_eq!(field(request, "file"), None);
        assert_eq!(field(request, "title"), Some("A"));
    }

    #[tokio::test]
    async fn remote_error_carries_code_and_method() {
        let transport = ScriptedTransport::new().api_error("6", "Permission denied");
        let api = helpers::client(transport);

        let err = api.call("doc.get", &[("doc_id", "1")]).await.unwrap_err();
        match &err {
            IpernityError::Remote {
                status,
                code,
                message,
                method,
                params,
            } => {
                assert_eq!(status, "error");
                assert_eq!(*code, 6);
                assert_eq!(message, "Permission denied");
                assert_eq!(method, "doc.get");
                assert_eq!(params.get("doc_id"), Some("1"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(err.method(), Some("doc.get"));
        assert_eq!(err.to_string(), "Ipernity status error 6: Permission denied");
    }

    #[tokio::test]
    async fn http_error_is_a_transport_error() {
        let transport = ScriptedTransport::new().raw(503, "unavailable".into());
        let api = helpers::client(transport);

        let err = api.call("user.get", &[("user_id", "1")]).await.unwrap_err();
        assert!(matches!(
            err,
            IpernityError::Transport { status: 503, ref method, .. } if method == "user.get"
        ));
    }

    #[tokio::test]
    async fn missing_envelope_is_malformed() {
        let transport = ScriptedTransport::new().raw(200, json!({"user": {}}).to_string());
        let api = helpers::client(transport);

        let err = api.call("user.get", &[]).await.unwrap_err();
        assert!(matches!(err, IpernityError::ApiResponseMalformed(_)));
    }

    #[tokio::test]
    async fn custom_catalog_decides_http_method() {
        let catalog = MethodCatalog::from_json(
            r#"{"custom.write": {"name": "custom.write", "authentication": {"post": 1}}}"#,
        )
        .unwrap();
        assert!(catalog.get("custom.write").unwrap().requires_post());

        let api = ipernity::Ipernity::builder(helpers::API_KEY, helpers::API_SECRET)
            .catalog(Arc::new(catalog))
            .url("http://localhost:9/api")
            .transport(ScriptedTransport::new().ok(json!({})))
            .build()
            .unwrap();

        api.call("custom.write", &[]).await.unwrap();
        let request = &api.transport().requests()[0];
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url.as_str(), "http://localhost:9/api/custom.write/json");

        assert!(matches!(
            api.call("test.echo", &[]).await,
            Err(IpernityError::UnknownMethod(_))
        ));
    }

    #[test]
    fn bundled_catalog_knows_core_methods() {
        let catalog = MethodCatalog::bundled().unwrap();
        for name in ["auth.checkToken", "upload.checkTickets", "album.getList", "doc.search"] {
            assert!(catalog.contains(name), "{name} missing");
        }
        assert!(catalog.get("upload.file").unwrap().requires_post());
        assert!(!catalog.get("doc.get").unwrap().requires_post());

        let upload = catalog.get("upload.file").unwrap();
        assert!(upload.requires_sign());
        assert!(upload.requires_token());
        assert_eq!(upload.permissions().get("doc"), Some(&ipernity::Permission::Write));
        assert!(catalog.get("test.echo").unwrap().permissions().is_empty());
    }

    #[test]
    fn catalog_from_method_list() {
        let list = json!({
            "methods": {
                "total": "2",
                "method": [
                    {"name": "b.two", "authentication": {"post": "1", "token": "1"}},
                    {"name": "a.one", "authentication": {"post": "0"}},
                ]
            }
        });
        let catalog = MethodCatalog::from_method_list(&list).unwrap();
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["a.one", "b.two"]);
        assert!(catalog.get("b.two").unwrap().requires_token());

        let round_trip = MethodCatalog::from_json(&catalog.to_json_pretty().unwrap()).unwrap();
        assert!(round_trip.get("b.two").unwrap().requires_post());
    }
}
