//! 用户菜单处理器
//!
//! 每个处理器依次提示输入，本地拒绝空的必填字段，
//! 仓储返回的错误只打印一行，然后回到菜单。

use std::io::{self, Write};
use tokio::io::AsyncBufRead;

use super::model::{NewUser, Role, User, UserChanges};
use super::repository::UserRepository;
use crate::app::terminal::Terminal;

const SEPARATOR: &str = "--------------------------------------";

fn print_user<R, W>(terminal: &mut Terminal<R, W>, user: &User) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    terminal.line(format!("ID: {}", user.id))?;
    terminal.line(format!("Name: {}", user.name))?;
    terminal.line(format!("Email: {}", user.email))?;
    terminal.line(format!("Role: {}", user.role))
}

/// 读取并解析用户 ID，失败时打印原因并返回 `None`
async fn prompt_id<R, W>(terminal: &mut Terminal<R, W>, label: &str) -> io::Result<Option<i64>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let Some(raw) = terminal.prompt(label).await? else {
        return Ok(None);
    };

    let raw = raw.trim();
    if raw.is_empty() {
        terminal.line("ID is required!")?;
        return Ok(None);
    }

    match raw.parse::<i64>() {
        Ok(id) => Ok(Some(id)),
        Err(_) => {
            terminal.line(format!("Invalid ID: {}", raw))?;
            Ok(None)
        }
    }
}

pub async fn create_user<R, W>(
    terminal: &mut Terminal<R, W>,
    users: &UserRepository,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    terminal.line("\nCreate new user")?;
    terminal.line(SEPARATOR)?;

    let Some(name) = terminal.prompt("Name: ").await? else {
        return Ok(());
    };
    if name.trim().is_empty() {
        return terminal.line("Name is required!");
    }

    let Some(email) = terminal.prompt("Email: ").await? else {
        return Ok(());
    };
    if email.trim().is_empty() {
        return terminal.line("Email is required!");
    }

    let Some(role) = terminal.prompt("Role (admin/user) [default: user]: ").await? else {
        return Ok(());
    };

    match users
        .create(NewUser::new(&name, &email, Role::coerce(&role)))
        .await
    {
        Ok(user) => {
            terminal.line("\nUser created successfully:")?;
            print_user(terminal, &user)
        }
        Err(e) => terminal.line(format!("\nError creating user: {}", e)),
    }
}

pub async fn list_users<R, W>(
    terminal: &mut Terminal<R, W>,
    users: &UserRepository,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    terminal.line("\nListing all users...")?;
    terminal.line(SEPARATOR)?;

    let all = match users.list_all().await {
        Ok(all) => all,
        Err(e) => return terminal.line(format!("\nError listing users: {}", e)),
    };

    if all.is_empty() {
        return terminal.line("No users found.");
    }

    terminal.line(format!("\nTotal: {} user(s)\n", all.len()))?;
    for user in &all {
        terminal.line(format!(
            "ID: {} | Name: {} | Email: {} | Role: {}",
            user.id, user.name, user.email, user.role
        ))?;
    }

    Ok(())
}

pub async fn find_user_by_id<R, W>(
    terminal: &mut Terminal<R, W>,
    users: &UserRepository,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    terminal.line("\nFind user by ID")?;
    terminal.line(SEPARATOR)?;

    let Some(id) = prompt_id(terminal, "Enter ID: ").await? else {
        return Ok(());
    };

    match users.find_by_id(id).await {
        Ok(Some(user)) => {
            terminal.line("\nUser found:")?;
            print_user(terminal, &user)
        }
        Ok(None) => terminal.line("\nUser not found."),
        Err(e) => terminal.line(format!("\nError finding user: {}", e)),
    }
}

pub async fn find_user_by_email<R, W>(
    terminal: &mut Terminal<R, W>,
    users: &UserRepository,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    terminal.line("\nFind user by email")?;
    terminal.line(SEPARATOR)?;

    let Some(email) = terminal.prompt("Enter email: ").await? else {
        return Ok(());
    };
    if email.trim().is_empty() {
        return terminal.line("Email is required!");
    }

    match users.find_by_email(&email).await {
        Ok(Some(user)) => {
            terminal.line("\nUser found:")?;
            print_user(terminal, &user)
        }
        Ok(None) => terminal.line("\nUser not found."),
        Err(e) => terminal.line(format!("\nError finding user: {}", e)),
    }
}

pub async fn update_user<R, W>(
    terminal: &mut Terminal<R, W>,
    users: &UserRepository,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    terminal.line("\nUpdate user")?;
    terminal.line(SEPARATOR)?;

    let Some(id) = prompt_id(terminal, "Enter user ID: ").await? else {
        return Ok(());
    };

    let current = match users.find_by_id(id).await {
        Ok(Some(user)) => user,
        Ok(None) => return terminal.line("User not found."),
        Err(e) => return terminal.line(format!("Error updating user: {}", e)),
    };

    terminal.line("\nCurrent user:")?;
    print_user(terminal, &current)?;
    terminal.line("\nLeave blank to keep the current value.\n")?;

    let Some(name) = terminal
        .prompt(&format!("New name [{}]: ", current.name))
        .await?
    else {
        return Ok(());
    };
    let Some(email) = terminal
        .prompt(&format!("New email [{}]: ", current.email))
        .await?
    else {
        return Ok(());
    };
    let Some(role) = terminal
        .prompt(&format!("New role [{}]: ", current.role))
        .await?
    else {
        return Ok(());
    };

    match users
        .update(id, UserChanges::from_input(&name, &email, &role))
        .await
    {
        Ok(Some(user)) => {
            terminal.line("\nUser updated:")?;
            print_user(terminal, &user)
        }
        Ok(None) => terminal.line("User not found."),
        Err(e) => terminal.line(format!("Error updating user: {}", e)),
    }
}

pub async fn delete_user<R, W>(
    terminal: &mut Terminal<R, W>,
    users: &UserRepository,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    terminal.line("\nDelete user")?;
    terminal.line(SEPARATOR)?;

    let Some(id) = prompt_id(terminal, "Enter user ID to delete: ").await? else {
        return Ok(());
    };

    let user = match users.find_by_id(id).await {
        Ok(Some(user)) => user,
        Ok(None) => return terminal.line("User not found."),
        Err(e) => return terminal.line(format!("Error deleting user: {}", e)),
    };

    terminal.line("\nUser to be deleted:")?;
    print_user(terminal, &user)?;

    let Some(confirm) = terminal.prompt("\nAre you sure? (yes/no): ").await? else {
        return Ok(());
    };

    match confirm.trim().to_lowercase().as_str() {
        "yes" | "y" => match users.delete(id).await {
            Ok(true) => terminal.line("\nUser deleted!"),
            Ok(false) => terminal.line("User not found."),
            Err(e) => terminal.line(format!("Error deleting user: {}", e)),
        },
        _ => terminal.line("\nUser not deleted."),
    }
}

pub async fn count_users<R, W>(
    terminal: &mut Terminal<R, W>,
    users: &UserRepository,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    terminal.line("\nCounting users")?;
    terminal.line(SEPARATOR)?;

    match users.stats().await {
        Ok(stats) => {
            terminal.line("\nStatistics:")?;
            terminal.line(format!(" Total: {}", stats.total))?;
            terminal.line(format!(" Admins: {}", stats.admins))?;
            terminal.line(format!(" Users: {}", stats.users))
        }
        Err(e) => terminal.line(format!("\nError counting users: {}", e)),
    }
}
