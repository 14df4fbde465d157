//! Seed instructions for the Judge.
//!
//! Prompt text is opaque configuration: the harness never inspects it, only
//! hands it to the Judge as the system-level directive.

/// First standalone extraction pass over a transcript.
pub const BASE_PROMPT: &str = r#"
Consider the following dialog between the user and the chatbot.
The bot's goal is to suggest a cheaper mobile plan based on the information the user provides.
The user's responses are not guaranteed to be consistent or coherent at all times.

Your goal is to generate a list of action items to create better user experience. These action items will be used to generate synthetic data to train the bot.
If there are no suggestions to generate, reply with "success"=true and return an empty list.

Example.

[dialog]
bot: Currently you pay $30 for your plan.
bot: Correct?
user: correct.
bot: Sorry, I did not get this.
user: yes.
[/dialog]

Recommendation list:
["make sure the bot understands nuanced and indirect answers to yes/no questions"]
"#;

/// Re-evaluation pass: assess the prior evaluation and extend it.
pub const ITERATIVE_PROMPT: &str = r#"
Consider the following dialog between the user and the chatbot.
The bot's goal is to suggest a cheaper mobile plan based on the information the user provides.
The user's responses are not guaranteed to be consistent or coherent at all times.

This dialog was evaluated by an LLM and this evaluation is given below.

Your job is to assess the quality of this evaluation and respond with "success"=true and repeat the original action list if there is nothing significant to add.
If there is something missing in the evaluation, respond with "success"=false and a new list of action items to create better user experience integrating the old list with new suggestions. Make sure the list items are unique and not repetitive.
"#;

/// Prompt-rewriting variant: improve the evaluation instruction itself.
pub const REWRITE_PROMPT: &str = r#"
Consider the following dialog between the user and the chatbot, together with the evaluation prompt that was used to assess it.
The bot's goal is to suggest a cheaper mobile plan based on the information the user provides.
The user's responses are not guaranteed to be consistent or coherent at all times.

Your job is to assess the quality of the evaluation prompt. Respond with "success"=true and repeat the prompt unchanged if it already elicits a complete evaluation.
If the prompt misses aspects of the dialog worth evaluating, respond with "success"=false and an improved prompt that covers them.
"#;

/// Bundled sample dialog, used when no transcript file is supplied.
pub const SAMPLE_DIALOG: &str = r#"
"bot": Hey there!
"bot": I'm a chatbot trained to help you find the best mobile phone plan for you. What can I do for you?
"user": hey
"bot": Hey there! I can find a better plan for you. Let me know when you're ready!
"user": do i still have the cheapest plan
"bot": Okay, let's start! First, I need some information about your current mobile phone plan:
"bot": Who's your current mobile phone provider?
"user": supermobile
"bot": Okay. Which mobile phone plan do you have?
"user": yellow basic 1000
"bot": How much did you pay in total last month?
"user": $32,29
"bot": Got it. How many minutes have you spent on the phone last month (national calls)?
"user": 652 minutes
"bot": How many text messages did you send last month?
"user": 23
"bot": How much data did you use last month?
"user": 1450
"bot": Do you often travel outside of Europe?
"user": yes
"bot": Okay, final question: How much are you willing to spend on a mobile phone plan per month?
"user": $10.00
"bot": Thanks, here are your information again:
"bot": Currently, you pay $32.29 for a supermobile yellow basic 1000 plan. Last month, you spent 652 minutes on the phone, sent 23 messages, and used 1.45 GB of data. You often travel outside of Europe. In total, you don't want to pay more than $10
"bot": Is that correct?
"user": yes
"bot": Alright, I'm looking for a better plan for you now. Stay tuned!
"bot": So, here is the best plan for you: Ultrafone offers a plan called Orange L for $14 per month. It comes with unlimited national calls, but without inclusive international minutes and free text messages. You would also get 2 GB of high-speed data!
"bot": Sounds good? I hope I could help you find a better mobile phone plan. If you want to try again, you can ask me anytime. Have a nice day!
"user": cool
"bot": Hi! How can I help you?
"user": can i book an additional package for international calls
"bot": I can respond to messages like 'new mobile phone plan'
"user": byebye
"bot": Sorry, I didn't understand that. Try asking me things like 'new plan'
"#;
