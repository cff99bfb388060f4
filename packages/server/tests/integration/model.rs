use serde_json::json;

use crate::common::{SECRET, TestApp, routes};

mod create {
    use super::*;

    #[tokio::test]
    async fn create_model_is_born_migrated_with_canonical_paths() {
        let app = TestApp::spawn().await;

        let res = app
            .post_json(
                routes::MODELS,
                &json!({
                    "name": "Building Architecture!",
                    "category": "architecture",
                    "description": "A test building",
                    "ifc_size": 4096,
                    "xkt_size": 2048,
                    "featured": true,
                }),
                Some(SECRET),
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["folder"].as_str().unwrap(), "building-architecture");
        assert_eq!(
            res.body["ifc_url"].as_str().unwrap(),
            "/models/building-architecture/building-architecture.ifc"
        );
        assert_eq!(
            res.body["xkt_url"].as_str().unwrap(),
            "/models/building-architecture/building-architecture.xkt"
        );
        assert_eq!(res.body["downloads"].as_i64().unwrap(), 0);
        assert_eq!(res.body["featured"].as_bool().unwrap(), true);
        assert!(res.body["id"].as_str().is_some());
    }

    #[tokio::test]
    async fn create_without_secret_is_401() {
        let app = TestApp::spawn().await;

        let res = app
            .post_json(
                routes::MODELS,
                &json!({
                    "name": "Unauthorized",
                    "category": "misc",
                    "ifc_size": 1,
                    "xkt_size": 1,
                }),
                None,
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["error"].as_str().unwrap(), "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn create_with_unsluggable_name_is_400() {
        let app = TestApp::spawn().await;

        let res = app
            .post_json(
                routes::MODELS,
                &json!({
                    "name": "???",
                    "category": "misc",
                    "ifc_size": 1,
                    "xkt_size": 1,
                }),
                Some(SECRET),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["error"].as_str().unwrap(), "VALIDATION_ERROR");
    }
}

mod paths_endpoint {
    use super::*;

    #[tokio::test]
    async fn computes_paths_without_creating_a_record() {
        let app = TestApp::spawn().await;

        let res = app
            .post_json(routes::MODEL_PATHS, &json!({"name": "Zellige Panel"}), Some(SECRET))
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["folder"].as_str().unwrap(), "zellige-panel");
        assert_eq!(
            res.body["ifc_url"].as_str().unwrap(),
            "/models/zellige-panel/zellige-panel.ifc"
        );
        assert!(app.all_records().await.is_empty());
    }

    #[tokio::test]
    async fn requires_secret() {
        let app = TestApp::spawn().await;
        let res = app
            .post_json(routes::MODEL_PATHS, &json!({"name": "Zellige Panel"}), None)
            .await;
        assert_eq!(res.status, 401);
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn list_is_public_and_newest_first() {
        let app = TestApp::spawn().await;
        app.create_model("First Model").await;
        app.create_model("Second Model").await;

        let res = app.get(routes::MODELS).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["total"].as_u64().unwrap(), 2);
        let models = res.body["models"].as_array().unwrap();
        assert_eq!(models[0]["name"].as_str().unwrap(), "Second Model");
        assert_eq!(models[1]["name"].as_str().unwrap(), "First Model");
    }

    #[tokio::test]
    async fn list_filters_by_category_and_featured() {
        let app = TestApp::spawn().await;
        app.post_json(
            routes::MODELS,
            &json!({
                "name": "Featured One",
                "category": "furniture",
                "ifc_size": 1,
                "xkt_size": 1,
                "featured": true,
            }),
            Some(SECRET),
        )
        .await;
        app.create_model("Plain Model").await;

        let res = app.get(&format!("{}?category=furniture", routes::MODELS)).await;
        assert_eq!(res.body["total"].as_u64().unwrap(), 1);
        assert_eq!(
            res.body["models"][0]["name"].as_str().unwrap(),
            "Featured One"
        );

        let res = app.get(&format!("{}?featured=true", routes::MODELS)).await;
        assert_eq!(res.body["total"].as_u64().unwrap(), 1);

        let res = app.get(&format!("{}?featured=false", routes::MODELS)).await;
        assert_eq!(res.body["total"].as_u64().unwrap(), 1);
        assert_eq!(res.body["models"][0]["name"].as_str().unwrap(), "Plain Model");
    }

    #[tokio::test]
    async fn get_unknown_model_is_404() {
        let app = TestApp::spawn().await;
        let res = app
            .get(&routes::model("0198c5b4-0000-7000-8000-000000000000"))
            .await;
        assert_eq!(res.status, 404);
        assert_eq!(res.body["error"].as_str().unwrap(), "NOT_FOUND");
    }
}

mod updates {
    use super::*;

    #[tokio::test]
    async fn rename_after_creation_does_not_recompute_folder() {
        let app = TestApp::spawn().await;
        let id = app.create_model("Original Name").await;

        let res = app
            .patch_json(
                &routes::model(&id),
                &json!({"name": "Completely Different"}),
                Some(SECRET),
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["name"].as_str().unwrap(), "Completely Different");
        // The slug stays stale on purpose.
        assert_eq!(res.body["folder"].as_str().unwrap(), "original-name");
        assert_eq!(
            res.body["ifc_url"].as_str().unwrap(),
            "/models/original-name/original-name.ifc"
        );
    }

    #[tokio::test]
    async fn patch_toggles_featured_and_bumps_updated_at() {
        let app = TestApp::spawn().await;
        let id = app.create_model("Some Model").await;

        let before = app.get(&routes::model(&id)).await;
        let updated_before = before.body["updated_at"].as_str().unwrap().to_string();

        let res = app
            .patch_json(&routes::model(&id), &json!({"featured": true}), Some(SECRET))
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["featured"].as_bool().unwrap(), true);
        assert_ne!(res.body["updated_at"].as_str().unwrap(), updated_before);
    }

    #[tokio::test]
    async fn patch_requires_secret() {
        let app = TestApp::spawn().await;
        let id = app.create_model("Locked Model").await;

        let res = app
            .patch_json(&routes::model(&id), &json!({"featured": true}), None)
            .await;
        assert_eq!(res.status, 401);
    }
}

mod deletion {
    use super::*;

    #[tokio::test]
    async fn delete_removes_storage_objects_then_record() {
        let app = TestApp::spawn().await;
        let id = app.create_model("Doomed Model").await;

        app.put_object(
            "/models/doomed-model/doomed-model.ifc",
            b"ifc".to_vec(),
            Some(SECRET),
        )
        .await;
        app.put_object(
            "/models/doomed-model/doomed-model.xkt",
            b"xkt".to_vec(),
            Some(SECRET),
        )
        .await;
        assert_eq!(app.store.len(), 2);

        let res = app.delete_object(&routes::model(&id), Some(SECRET)).await;
        assert_eq!(res.status, 204);

        assert_eq!(app.store.len(), 0);
        assert!(app.all_records().await.is_empty());
    }

    #[tokio::test]
    async fn delete_tolerates_absent_storage_objects() {
        let app = TestApp::spawn().await;
        let id = app.create_model("Ghost Model").await;

        let res = app.delete_object(&routes::model(&id), Some(SECRET)).await;

        assert_eq!(res.status, 204);
        assert!(app.all_records().await.is_empty());
    }
}

mod downloads {
    use super::*;

    #[tokio::test]
    async fn download_increments_counter_without_auth() {
        let app = TestApp::spawn().await;
        let id = app.create_model("Popular Model").await;

        let first = app.post_empty(&routes::model_download(&id), None).await;
        assert_eq!(first.status, 200);
        assert_eq!(first.body["downloads"].as_i64().unwrap(), 1);

        let second = app.post_empty(&routes::model_download(&id), None).await;
        assert_eq!(second.body["downloads"].as_i64().unwrap(), 2);
    }

    #[tokio::test]
    async fn download_does_not_bump_updated_at() {
        let app = TestApp::spawn().await;
        let id = app.create_model("Quiet Model").await;

        let before = app.get(&routes::model(&id)).await;
        let updated_before = before.body["updated_at"].as_str().unwrap().to_string();

        app.post_empty(&routes::model_download(&id), None).await;

        let after = app.get(&routes::model(&id)).await;
        assert_eq!(after.body["updated_at"].as_str().unwrap(), updated_before);
    }
}

mod end_to_end {
    use super::*;

    #[tokio::test]
    async fn upload_create_and_fetch_zellige_panel() {
        let app = TestApp::spawn().await;

        // Derive the canonical upload paths first.
        let paths = app
            .post_json(routes::MODEL_PATHS, &json!({"name": "Zellige Panel"}), Some(SECRET))
            .await;
        assert_eq!(paths.status, 200);
        let ifc_url = paths.body["ifc_url"].as_str().unwrap().to_string();
        let xkt_url = paths.body["xkt_url"].as_str().unwrap().to_string();
        assert_eq!(ifc_url, "/models/zellige-panel/zellige-panel.ifc");
        assert_eq!(xkt_url, "/models/zellige-panel/zellige-panel.xkt");

        // Both files land in storage before the record exists.
        let put_ifc = app.put_object(&ifc_url, b"IFC-DATA".to_vec(), Some(SECRET)).await;
        let put_xkt = app.put_object(&xkt_url, b"XKT-DATA".to_vec(), Some(SECRET)).await;
        assert_eq!(put_ifc.status, 200);
        assert_eq!(put_xkt.status, 200);

        let created = app
            .post_json(
                routes::MODELS,
                &json!({
                    "name": "Zellige Panel",
                    "category": "ornament",
                    "description": "Glazed terracotta panel",
                    "ifc_size": 8,
                    "xkt_size": 8,
                }),
                Some(SECRET),
            )
            .await;
        assert_eq!(created.status, 201);
        assert_eq!(created.body["folder"].as_str().unwrap(), "zellige-panel");
        assert_eq!(created.body["ifc_url"].as_str().unwrap(), ifc_url);

        let got_ifc = app.get(&ifc_url).await;
        assert_eq!(got_ifc.status, 200);
        assert_eq!(got_ifc.bytes, b"IFC-DATA");

        let got_xkt = app.get(&xkt_url).await;
        assert_eq!(got_xkt.status, 200);
        assert_eq!(
            got_xkt.header("content-type"),
            Some("application/octet-stream")
        );
    }
}
