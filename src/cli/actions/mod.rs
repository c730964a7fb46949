pub mod navigate;
pub mod run;
pub mod serve;

#[derive(Debug)]
pub enum Action {
    Serve(serve::Args),
    Navigate(navigate::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
