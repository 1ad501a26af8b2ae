use std::env;
use std::error::Error;
use std::process;
use std::rc::Rc;

use heap_storage::fm::{FileManager, FileManagerConfig};
use heap_storage::test::test_heap_storage;
use log::info;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        let exec = args.first().map(String::as_str).unwrap_or("heap-storage");
        eprintln!("Usage: {} DB\n\nOptions\nDB\tpath to database environment", exec);
        process::exit(1);
    }

    // 初始化数据库环境（目录不存在时创建）
    let store = FileManager::open_env(&args[1], FileManagerConfig::default())?;
    info!("数据库环境: {}", store.home().display());

    let passed = test_heap_storage(Rc::new(store))?;
    println!("test_heap_storage: {}", if passed { "ok" } else { "failed" });
    if !passed {
        process::exit(1);
    }
    Ok(())
}
