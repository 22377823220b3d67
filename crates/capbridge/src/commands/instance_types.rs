use capbridge_autoscalr::InstanceCatalog;
use colored::Colorize;

pub fn handle() {
    let catalog = InstanceCatalog::builtin();

    println!("{}", format!("{:<16} {:>6}", "TYPE", "VCPUS").bold());
    println!("{}", "─".repeat(23).dimmed());
    for record in catalog.iter() {
        println!("{:<16} {:>6}", record.name, record.vcpus);
    }
}
