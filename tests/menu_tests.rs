use usercrud::app::user::{NewUser, Role, User, UserFilter, UserRepository};
use usercrud::app::{Menu, Terminal};
use usercrud::config::{DatabaseConfig, SyncOptions};
use usercrud::infrastructure::DatabaseManager;

async fn repository() -> UserRepository {
    let db = DatabaseManager::new(&DatabaseConfig::in_memory()).unwrap();
    db.authenticate().await.unwrap();
    db.sync::<User>(SyncOptions::default()).await.unwrap();
    UserRepository::new(db.get_pool().clone())
}

/// 按脚本输入运行一次菜单会话，返回全部输出
async fn session(users: &UserRepository, script: &str) -> String {
    let terminal = Terminal::new(script.as_bytes(), Vec::new());
    let mut menu = Menu::new(terminal, users.clone());
    menu.run().await.unwrap();
    String::from_utf8(menu.into_output()).unwrap()
}

#[tokio::test]
async fn test_exit_immediately() {
    let users = repository().await;
    let output = session(&users, "0\n").await;

    assert!(output.contains("1 - Create user"));
    assert!(output.contains("0 - Exit"));
    assert!(output.ends_with("Goodbye!\n"));
}

#[tokio::test]
async fn test_end_of_input_leaves_menu() {
    let users = repository().await;
    let output = session(&users, "").await;
    assert!(output.ends_with("Goodbye!\n"));
}

#[tokio::test]
async fn test_invalid_option() {
    let users = repository().await;
    let output = session(&users, "9\nabc\n0\n").await;
    assert_eq!(output.matches("Invalid option! Please try again.").count(), 2);
}

#[tokio::test]
async fn test_invalid_utf8_choice_is_invalid_option() {
    let users = repository().await;

    let terminal = Terminal::new(&b"\xff\xfe\n0\n"[..], Vec::new());
    let mut menu = Menu::new(terminal, users.clone());
    menu.run().await.unwrap();

    let output = String::from_utf8(menu.into_output()).unwrap();
    assert!(output.contains("Invalid option! Please try again."));
    assert!(output.ends_with("Goodbye!\n"));
}

#[tokio::test]
async fn test_invalid_utf8_in_handler_is_validated() {
    let users = repository().await;

    let terminal = Terminal::new(&b"1\nAna\nana\xff@x.com\n\n3\n\xff\n0\n"[..], Vec::new());
    let mut menu = Menu::new(terminal, users.clone());
    menu.run().await.unwrap();

    let output = String::from_utf8(menu.into_output()).unwrap();
    assert!(output.contains("Error creating user: Validation error"));
    assert!(output.contains("Invalid ID: \u{FFFD}"));
    assert_eq!(users.count(&UserFilter::all()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_create_user_flow() {
    let users = repository().await;
    let output = session(&users, "1\nAna\nana@x.com\nadmin\n0\n").await;

    assert!(output.contains("User created successfully:"));
    assert!(output.contains("ID: 1\nName: Ana\nEmail: ana@x.com\nRole: admin"));

    let ana = users.find_by_id(1).await.unwrap().unwrap();
    assert_eq!(ana.role, Role::Admin);
}

#[tokio::test]
async fn test_create_defaults_and_coerces_role() {
    let users = repository().await;
    session(&users, "1\nBob\nbob@x.com\n\n1\nCid\ncid@x.com\nowner\n0\n").await;

    let stats = users.stats().await.unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.users, 2);
}

#[tokio::test]
async fn test_create_rejects_empty_fields_locally() {
    let users = repository().await;

    let output = session(&users, "1\n   \n0\n").await;
    assert!(output.contains("Name is required!"));
    assert!(!output.contains("Email: "));

    let output = session(&users, "1\nAna\n\n0\n").await;
    assert!(output.contains("Email is required!"));

    assert_eq!(users.count(&UserFilter::all()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_create_reports_repository_errors() {
    let users = repository().await;

    let output = session(
        &users,
        "1\nAna\nana@x.com\n\n1\nBob\nana@x.com\n\n1\nCid\nnot-an-email\n\n0\n",
    )
    .await;

    assert_eq!(output.matches("Error creating user: Validation error").count(), 2);
    assert!(output.contains("email must be unique"));
    assert!(output.contains("email must be a valid address"));
    assert_eq!(users.count(&UserFilter::all()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_list_users() {
    let users = repository().await;

    let output = session(&users, "2\n0\n").await;
    assert!(output.contains("No users found."));

    users
        .create(NewUser::new("Ana", "ana@x.com", Role::Admin))
        .await
        .unwrap();
    users
        .create(NewUser::new("Bob", "bob@x.com", Role::User))
        .await
        .unwrap();

    let output = session(&users, "2\n0\n").await;
    assert!(output.contains("Total: 2 user(s)"));
    let ana = output
        .find("ID: 1 | Name: Ana | Email: ana@x.com | Role: admin")
        .unwrap();
    let bob = output
        .find("ID: 2 | Name: Bob | Email: bob@x.com | Role: user")
        .unwrap();
    assert!(ana < bob);
}

#[tokio::test]
async fn test_find_by_id_and_email() {
    let users = repository().await;
    users
        .create(NewUser::new("Ana", "ana@x.com", Role::Admin))
        .await
        .unwrap();

    let output = session(&users, "3\n1\n3\n7\n3\nabc\n3\n\n0\n").await;
    assert!(output.contains("User found:\nID: 1\nName: Ana"));
    assert!(output.contains("User not found."));
    assert!(output.contains("Invalid ID: abc"));
    assert!(output.contains("ID is required!"));

    let output = session(&users, "4\nana@x.com\n4\nbob@x.com\n4\n\n0\n").await;
    assert!(output.contains("User found:\nID: 1"));
    assert!(output.contains("User not found."));
    assert!(output.contains("Email is required!"));
}

#[tokio::test]
async fn test_update_flow() {
    let users = repository().await;
    users
        .create(NewUser::new("Ana", "ana@x.com", Role::User))
        .await
        .unwrap();

    let output = session(&users, "5\n1\nAna Maria\n\nadmin\n0\n").await;
    assert!(output.contains("Current user:"));
    assert!(output.contains("Leave blank to keep the current value."));
    assert!(output.contains("New name [Ana]: "));
    assert!(output.contains("New email [ana@x.com]: "));
    assert!(output.contains("New role [user]: "));
    assert!(output.contains("User updated:\nID: 1\nName: Ana Maria\nEmail: ana@x.com\nRole: admin"));

    // 无效角色被静默忽略
    session(&users, "5\n1\n\n\nguest\n0\n").await;
    let ana = users.find_by_id(1).await.unwrap().unwrap();
    assert_eq!(ana.role, Role::Admin);
    assert_eq!(ana.name, "Ana Maria");
}

#[tokio::test]
async fn test_update_missing_and_invalid() {
    let users = repository().await;
    users
        .create(NewUser::new("Ana", "ana@x.com", Role::User))
        .await
        .unwrap();
    users
        .create(NewUser::new("Bob", "bob@x.com", Role::User))
        .await
        .unwrap();

    let output = session(&users, "5\n99\n0\n").await;
    assert!(output.contains("User not found."));
    assert!(!output.contains("New name"));

    let output = session(&users, "5\n1\n\nbob@x.com\n\n0\n").await;
    assert!(output.contains("Error updating user: Validation error: email must be unique"));

    let ana = users.find_by_id(1).await.unwrap().unwrap();
    assert_eq!(ana.email, "ana@x.com");
}

#[tokio::test]
async fn test_delete_flow() {
    let users = repository().await;
    users
        .create(NewUser::new("Ana", "ana@x.com", Role::User))
        .await
        .unwrap();

    let output = session(&users, "6\n1\nno\n0\n").await;
    assert!(output.contains("User to be deleted:"));
    assert!(output.contains("User not deleted."));
    assert_eq!(users.count(&UserFilter::all()).await.unwrap(), 1);

    let output = session(&users, "6\n42\n0\n").await;
    assert!(output.contains("User not found."));
    assert!(!output.contains("Are you sure?"));

    let output = session(&users, "6\n1\nYES\n0\n").await;
    assert!(output.contains("User deleted!"));
    assert_eq!(users.count(&UserFilter::all()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_count_flow() {
    let users = repository().await;
    users
        .create(NewUser::new("Ana", "ana@x.com", Role::Admin))
        .await
        .unwrap();
    users
        .create(NewUser::new("Bob", "bob@x.com", Role::User))
        .await
        .unwrap();
    users
        .create(NewUser::new("Cid", "cid@x.com", Role::User))
        .await
        .unwrap();

    let output = session(&users, "7\n0\n").await;
    assert!(output.contains("Statistics:\n Total: 3\n Admins: 1\n Users: 2\n"));
}
