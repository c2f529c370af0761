use microblog_core::{gravatar_url, NewUser, Post, User, ValidationError};

#[test]
fn avatar_url_prefix_is_hash_of_email() {
    let user = NewUser::new("john", "john@example.com");
    let avatar = user.avatar(128);
    let expected = "http://www.gravatar.com/avatar/d4c74594d841139328695756648b6bd6";
    assert_eq!(&avatar[..expected.len()], expected);
    assert!(avatar.ends_with("s=128"));
}

#[test]
fn avatar_url_is_deterministic_across_sizes_and_saved_state() {
    let unsaved = NewUser::new("john", "john@example.com");
    let saved = unsaved.clone().into_user(7);

    for size in [16, 80, 128, 512] {
        assert_eq!(unsaved.avatar(size), saved.avatar(size));
        assert_eq!(saved.avatar(size), gravatar_url("john@example.com", size));
    }
    assert_ne!(
        saved.avatar(80),
        gravatar_url("susan@example.com", 80),
        "different emails must hash differently"
    );
}

#[test]
fn new_user_validation_enforces_bounds() {
    assert!(NewUser::new("john", "john@example.com").validate().is_ok());

    let err = NewUser::new("", "john@example.com").validate().unwrap_err();
    assert_eq!(err, ValidationError::Blank { field: "nickname" });

    let err = NewUser::new("j".repeat(65), "john@example.com")
        .validate()
        .unwrap_err();
    assert!(matches!(
        err,
        ValidationError::TooLong {
            field: "nickname",
            ..
        }
    ));

    let err = NewUser::new("john smith", "john@example.com")
        .validate()
        .unwrap_err();
    assert!(matches!(err, ValidationError::InvalidNickname(_)));

    let long_email = format!("{}@example.com", "x".repeat(120));
    let err = NewUser::new("john", long_email).validate().unwrap_err();
    assert!(matches!(err, ValidationError::TooLong { field: "email", .. }));
}

#[test]
fn session_identity_and_display() {
    let user = NewUser::new("john", "john@example.com").into_user(42);

    assert_eq!(user.session_id(), "42");
    assert!(user.is_authenticated());
    assert!(user.is_active());
    assert!(!user.is_anonymous());
    assert_eq!(user.to_string(), "<User 'john'>");

    let post = Post {
        id: 1,
        body: "hello".to_string(),
        timestamp: 0,
        user_id: 42,
    };
    assert_eq!(post.to_string(), "<Post 'hello'>");
}

#[test]
fn user_serialization_uses_column_names() {
    let mut user = NewUser::new("john", "john@example.com").into_user(3);
    user.about_me = Some("hi".to_string());
    user.last_seen = Some(1_700_000_000_000);

    let json = serde_json::to_value(&user).unwrap();
    assert_eq!(json["id"], 3);
    assert_eq!(json["nickname"], "john");
    assert_eq!(json["email"], "john@example.com");
    assert_eq!(json["about_me"], "hi");
    assert_eq!(json["last_seen"], 1_700_000_000_000_i64);

    let decoded: User = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, user);
}
