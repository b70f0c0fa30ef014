//! Ask command - one-shot question from the terminal

use clap::Args;

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Question to answer
    pub question: String,
}

/// Build the pipeline, answer, print the reply
pub async fn run(args: AskArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let bot = crate::create_bot(&config)?;

    bot.initialize().await?;

    let reply = bot.ask(&args.question).await;
    println!("{}", reply.content);

    Ok(())
}
