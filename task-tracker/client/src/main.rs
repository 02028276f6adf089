use clap::{Parser, Subcommand};
use task_tracker_client::{Notification, Task, TaskBoard, TaskClient};

#[derive(Parser, Debug)]
#[command(about = "Manage tasks on a task tracker server")]
struct Cli {
    /// Base URL of the task tracker server
    #[arg(long, env = "TASKS_URL", default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
enum Commands {
    /// List every task, newest first
    List,
    /// Show one task
    Get { id: i32 },
    /// Add a task
    Add { title: String },
    /// Flip the completed flag of a task
    Toggle { id: i32 },
    /// Change the title of a task
    Rename { id: i32, title: String },
    /// Delete a task
    Delete { id: i32 },
}

fn print_task(task: &Task) {
    let mark = if task.completed { "x" } else { " " };
    println!(
        "[{}] {:>4}  {}  ({})",
        mark,
        task.id,
        task.title,
        task.created_at.format("%Y-%m-%d %H:%M:%S")
    );
}

fn print_notification(board: &TaskBoard) {
    match board.notification() {
        Some(Notification::Success(message)) => println!("{}", message),
        Some(Notification::Error(message)) => eprintln!("{}", message),
        None => {}
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    let client = TaskClient::new(args.url);
    let mut board = TaskBoard::new(client.clone());

    match args.command {
        Commands::List => {
            let tasks = board.load().await?;
            if tasks.is_empty() {
                println!("No tasks yet");
            }
            tasks.iter().for_each(print_task);
        }
        Commands::Get { id } => {
            let task = client.get_task_by_id(id).await?;
            print_task(&task);
        }
        Commands::Add { title } => match board.add_task(&title).await? {
            Some(task) => {
                print_notification(&board);
                print_task(&task);
            }
            None => anyhow::bail!("Title must not be blank"),
        },
        Commands::Toggle { id } => {
            let task = board.toggle(id).await?;
            print_task(&task);
        }
        Commands::Rename { id, title } => {
            let task = board.rename(id, &title).await?;
            print_task(&task);
        }
        Commands::Delete { id } => {
            board.delete(id).await?;
            print_notification(&board);
        }
    };

    Ok(())
}
