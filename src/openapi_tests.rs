#[cfg(test)]
mod tests {
    use crate::schemas::ApiDoc;
    use utoipa::OpenApi;
    use utoipa::openapi::{PathItemType, RefOr, schema::Schema};

    fn object_properties(name: &str) -> Vec<String> {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.expect("components");
        match components.schemas.get(name) {
            Some(RefOr::T(Schema::Object(obj))) => obj.properties.keys().cloned().collect(),
            _ => panic!("{} should be an object schema", name),
        }
    }

    #[test]
    fn test_openapi_schema_generation() {
        let openapi = ApiDoc::openapi();

        assert!(openapi.components.is_some());
        assert!(serde_json::to_string(&openapi).is_ok());
    }

    #[test]
    fn test_error_response_schema_structure() {
        let properties = object_properties("ErrorResponse");
        for field in ["error", "code", "success"] {
            assert!(properties.iter().any(|p| p == field), "missing {}", field);
        }
    }

    #[test]
    fn test_health_response_schema_structure() {
        let properties = object_properties("HealthResponse");
        for field in ["status", "version", "database"] {
            assert!(properties.iter().any(|p| p == field), "missing {}", field);
        }
    }

    #[test]
    fn test_user_response_never_exposes_password() {
        let properties = object_properties("UserResponse");
        assert!(properties.iter().any(|p| p == "username"));
        assert!(properties.iter().any(|p| p == "joined_at"));
        assert!(!properties.iter().any(|p| p == "password"));
    }

    #[test]
    fn test_documented_routes() {
        let openapi = ApiDoc::openapi();
        let paths = &openapi.paths.paths;

        let expected = [
            ("/health", PathItemType::Get),
            ("/api/v1/users", PathItemType::Post),
            ("/api/v1/users", PathItemType::Get),
            ("/api/v1/users/{user_id}", PathItemType::Delete),
            ("/api/v1/users/{user_id}/password", PathItemType::Put),
            ("/api/v1/auth/verify", PathItemType::Post),
            ("/api/v1/users/{user_id}/profile", PathItemType::Put),
            ("/api/v1/addresses/{address_id}", PathItemType::Put),
            ("/api/v1/notifications/{notification_id}/read", PathItemType::Put),
            ("/api/v1/users/{user_id}/activities", PathItemType::Post),
        ];
        for (path, method) in expected {
            let item = paths
                .get(path)
                .unwrap_or_else(|| panic!("{} is not documented", path));
            assert!(item.operations.contains_key(&method), "{} lacks an operation", path);
        }
    }

    #[test]
    fn test_activities_have_no_update_or_delete() {
        let openapi = ApiDoc::openapi();
        let item = openapi
            .paths
            .paths
            .get("/api/v1/users/{user_id}/activities")
            .unwrap();

        assert!(!item.operations.contains_key(&PathItemType::Put));
        assert!(!item.operations.contains_key(&PathItemType::Delete));
    }

    #[test]
    fn test_health_documents_only_success() {
        let openapi = ApiDoc::openapi();
        let get = openapi
            .paths
            .paths
            .get("/health")
            .and_then(|item| item.operations.get(&PathItemType::Get))
            .expect("health operation");

        let statuses: Vec<&str> = get.responses.responses.keys().map(String::as_str).collect();
        assert_eq!(statuses, vec!["200"]);
    }

    #[test]
    fn test_all_error_responses_reference_correct_schema() {
        let openapi_json = serde_json::to_string(&ApiDoc::openapi()).unwrap();

        assert!(!openapi_json.contains("crate.schemas.ErrorResponse"));
        assert!(!openapi_json.contains("crate::schemas::ErrorResponse"));
        assert!(openapi_json.contains("ErrorResponse"));
    }
}
