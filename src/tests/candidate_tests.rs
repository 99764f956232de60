//! tests/candidate_tests.rs
//! Intake y consultas sobre `CandidateService`.

#[cfg(test)]
mod tests {
    use actix_rt::test;

    use crate::errors::{IntakeError, QueryError};
    use crate::models::candidate_model::{CandidateInput, CandidateQuery, CandidateStatus};
    use crate::tests::support;

    fn valid_input() -> CandidateInput {
        CandidateInput {
            name: "Ana Pérez".to_string(),
            email: "ana@example.com".to_string(),
            phone_number: "+1 555 123 4567".to_string(),
            link: Some("https://linkedin.com/in/ana".to_string()),
            dob: Some("1990-07-21".to_string()),
        }
    }

    #[test]
    async fn test_create_candidate_starts_pending() {
        let service = support::test_service().await;

        let rec = service.create_candidate(valid_input()).await.unwrap();

        assert_eq!(rec.status, CandidateStatus::Pending);
        assert_eq!(rec.external_id, None);
        assert_eq!(rec.relay_attempts, 0);
        assert_eq!(rec.dob.as_deref(), Some("1990-07-21"));
        assert_eq!(rec.created_at, rec.updated_at);
    }

    #[test]
    async fn test_empty_optional_fields_are_stored_as_null() {
        let service = support::test_service().await;
        let input = CandidateInput {
            link: Some(String::new()),
            dob: Some(String::new()),
            ..valid_input()
        };

        let rec = service.create_candidate(input).await.unwrap();
        assert_eq!(rec.link, None);
        assert_eq!(rec.dob, None);
    }

    #[test]
    async fn test_short_e164_phone_is_accepted() {
        let service = support::test_service().await;
        let input = CandidateInput {
            phone_number: "+4412345".to_string(),
            ..valid_input()
        };

        assert!(service.create_candidate(input).await.is_ok());
    }

    #[test]
    async fn test_invalid_input_returns_field_errors() {
        let service = support::test_service().await;
        let input = CandidateInput {
            name: String::new(),
            email: "no-es-email".to_string(),
            phone_number: "12345".to_string(),
            link: Some("no es url".to_string()),
            dob: None,
        };

        match service.create_candidate(input).await {
            Err(IntakeError::Validation(errors)) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["email", "link", "name", "phoneNumber"]);
                let phone = errors.iter().find(|e| e.field == "phoneNumber").unwrap();
                assert_eq!(phone.message, "Phone number must be at least 10 digits");
            }
            other => panic!("se esperaba error de validación, llegó {:?}", other),
        }

        let page = service
            .list_candidates(CandidateQuery::default())
            .await
            .unwrap();
        assert_eq!(page.total, 0, "un input inválido no debe persistirse");
    }

    #[test]
    async fn test_list_paginates_newest_first() {
        let service = support::test_service().await;
        for i in 0..5 {
            support::seed(&service, &format!("C{}", i), 10 - i).await;
        }

        let page = service
            .list_candidates(CandidateQuery {
                page: Some(2),
                limit: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total, 5);
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 3);
        let names: Vec<&str> = page.data.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["C2", "C1"]);
    }

    #[test]
    async fn test_list_clamps_page_and_limit() {
        let service = support::test_service().await;
        support::seed(&service, "Ana", 1).await;

        let page = service
            .list_candidates(CandidateQuery {
                page: Some(0),
                limit: Some(-3),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.data.len(), 1);
    }

    #[test]
    async fn test_huge_page_returns_empty_page() {
        let service = support::test_service().await;
        support::seed(&service, "Ana", 1).await;

        let page = service
            .list_candidates(CandidateQuery {
                page: Some(i64::MAX),
                limit: Some(100),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.page, i64::MAX);
        assert_eq!(page.total, 1);
        assert_eq!(page.total_pages, 1);
        assert!(page.data.is_empty());
    }

    #[test]
    async fn test_list_filters_by_status_and_search() {
        let service = support::test_service().await;
        let ana = support::seed(&service, "Ana", 3).await;
        let anabel = support::seed(&service, "Anabel", 2).await;
        support::seed(&service, "Bruno", 1).await;
        service.mark_success(anabel.id, anabel.id).await.unwrap();

        let by_search = service
            .list_candidates(CandidateQuery {
                search: Some("ANA".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_search.total, 2);

        let by_both = service
            .list_candidates(CandidateQuery {
                search: Some("ana".to_string()),
                status: Some("pending".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_both.total, 1);
        assert_eq!(by_both.data[0].id, ana.id);

        // busca también en el email
        let by_email = service
            .list_candidates(CandidateQuery {
                search: Some("bruno@".to_string()),
                status: Some("ALL".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_email.total, 1);
    }

    #[test]
    async fn test_search_wildcards_are_literal() {
        let service = support::test_service().await;
        support::seed(&service, "Ana", 2).await;
        support::seed_input(
            &service,
            CandidateInput::test_new("100% Real", "real@example.com"),
            1,
        )
        .await;

        let page = service
            .list_candidates(CandidateQuery {
                search: Some("%".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].name, "100% Real");
    }

    #[test]
    async fn test_unknown_status_filter_is_rejected() {
        let service = support::test_service().await;

        let res = service
            .list_candidates(CandidateQuery {
                status: Some("DONE".to_string()),
                ..Default::default()
            })
            .await;
        assert!(matches!(res, Err(QueryError::InvalidStatus(s)) if s == "DONE"));
    }

    #[test]
    async fn test_list_successful_only_returns_success() {
        let service = support::test_service().await;
        let a = support::seed(&service, "Ana", 3).await;
        let b = support::seed(&service, "Bruno", 2).await;
        support::seed(&service, "Carla", 1).await;
        service.mark_success(a.id, a.id).await.unwrap();
        service.mark_success(b.id, b.id).await.unwrap();

        let list = service.list_successful().await.unwrap();
        let ids: Vec<i64> = list.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);
    }
}
