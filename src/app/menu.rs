//! 交互菜单主循环

use std::io::{self, Write};
use tokio::io::AsyncBufRead;
use tracing::debug;

use super::terminal::Terminal;
use super::user::{handler, UserRepository};

/// 菜单选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    Create,
    List,
    FindById,
    FindByEmail,
    Update,
    Delete,
    Count,
    Exit,
}

impl MenuOption {
    pub fn parse(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(MenuOption::Create),
            "2" => Some(MenuOption::List),
            "3" => Some(MenuOption::FindById),
            "4" => Some(MenuOption::FindByEmail),
            "5" => Some(MenuOption::Update),
            "6" => Some(MenuOption::Delete),
            "7" => Some(MenuOption::Count),
            "0" => Some(MenuOption::Exit),
            _ => None,
        }
    }
}

pub struct Menu<R, W> {
    terminal: Terminal<R, W>,
    users: UserRepository,
}

impl<R, W> Menu<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(terminal: Terminal<R, W>, users: UserRepository) -> Self {
        Self { terminal, users }
    }

    fn print_menu(&mut self) -> io::Result<()> {
        let t = &mut self.terminal;
        t.line("\n======================================")?;
        t.line("             USER DATABASE")?;
        t.line("======================================")?;
        t.line("\n1 - Create user")?;
        t.line("2 - List all users")?;
        t.line("3 - Find user by ID")?;
        t.line("4 - Find user by email")?;
        t.line("5 - Update user")?;
        t.line("6 - Delete user")?;
        t.line("7 - Count users")?;
        t.line("0 - Exit\n")
    }

    /// 运行菜单，选择 0 或输入结束时返回
    pub async fn run(&mut self) -> io::Result<()> {
        loop {
            self.print_menu()?;

            let Some(choice) = self.terminal.prompt("Choose: ").await? else {
                debug!("Input closed, leaving menu");
                return self.terminal.line("\nGoodbye!");
            };

            let terminal = &mut self.terminal;
            let users = &self.users;
            match MenuOption::parse(&choice) {
                Some(MenuOption::Create) => handler::create_user(terminal, users).await?,
                Some(MenuOption::List) => handler::list_users(terminal, users).await?,
                Some(MenuOption::FindById) => handler::find_user_by_id(terminal, users).await?,
                Some(MenuOption::FindByEmail) => {
                    handler::find_user_by_email(terminal, users).await?
                }
                Some(MenuOption::Update) => handler::update_user(terminal, users).await?,
                Some(MenuOption::Delete) => handler::delete_user(terminal, users).await?,
                Some(MenuOption::Count) => handler::count_users(terminal, users).await?,
                Some(MenuOption::Exit) => return terminal.line("\nGoodbye!"),
                None => terminal.line("\nInvalid option! Please try again.")?,
            }
        }
    }

    pub fn into_output(self) -> W {
        self.terminal.into_output()
    }
}
