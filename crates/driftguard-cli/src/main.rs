fn main() -> anyhow::Result<()> {
    driftguard_cli::run()
}
